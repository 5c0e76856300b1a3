pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("{message}")]
	Evaluation { message: String },
	#[error("Backend error: {message}")]
	Backend { message: String },
}
impl From<relab_client::Error> for Error {
	fn from(err: relab_client::Error) -> Self {
		match err {
			relab_client::Error::Evaluation { message } => Self::Evaluation { message },
			other => Self::Backend { message: other.to_string() },
		}
	}
}
