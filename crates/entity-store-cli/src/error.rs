use core::fmt;

#[derive(Debug)]
pub struct CliError;

impl fmt::Display for CliError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("the entity store CLI encountered an error")
    }
}

impl error_stack::Context for CliError {}

#[derive(Debug)]
pub enum HealthcheckError {
    NotHealthy,
    Timeout,
}

impl fmt::Display for HealthcheckError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHealthy => fmt.write_str("healthcheck failed"),
            Self::Timeout => fmt.write_str("healthcheck timed out"),
        }
    }
}

impl error_stack::Context for HealthcheckError {}
