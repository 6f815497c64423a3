use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    #[from(ignore)]
    CliUsage(String),

    /// A provider answered, but not with something we can read.
    #[from(ignore)]
    InvalidHttpResponse(String),

    /// The provider itself reported an error in its body.
    #[from(ignore)]
    ProviderError(String),

    SystemTime(std::time::SystemTimeError),

    File(std::io::Error),

    Fmt(std::fmt::Error),

    Json(serde_json::Error),

    Reqwest(reqwest::Error),

    TimeFormat(time::error::Format),

    Clipboard(arboard::Error),
}

// region:    --- Error Boilerplate

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
