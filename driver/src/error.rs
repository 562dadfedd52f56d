use error_stack::Report;
use kernel::KernelError;
use tokio::time::error::Elapsed;

/// Maps a driver-native error into the kernel's error context.
pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}

impl<T> ConvertError for Result<T, dotenvy::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = match &error {
                dotenvy::Error::EnvVar(_) => "environment variable is missing or not unicode",
                _ => "failed to load .env",
            };
            Report::new(error)
                .change_context(KernelError::Internal)
                .attach_printable(context)
        })
    }
}

impl<T> ConvertError for Result<T, Elapsed> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| Report::new(error).change_context(KernelError::Timeout))
    }
}
