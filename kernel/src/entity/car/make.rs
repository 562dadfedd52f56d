use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Fromln, AsRefln, Serialize, Deserialize)]
pub struct CarMake(String);

impl CarMake {
    pub fn new(make: impl Into<String>) -> Self {
        Self(make.into())
    }
}
