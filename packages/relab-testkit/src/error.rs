pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to bind the mock backend listener.")]
	Bind(#[from] std::io::Error),
}
