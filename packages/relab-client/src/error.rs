pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Invalid backend base URL: {message}")]
	InvalidBaseUrl { message: String },
	#[error("Backend returned HTTP {status}: {body}")]
	Status { status: u16, body: String },
	#[error("{message}")]
	Evaluation { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
