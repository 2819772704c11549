//! Caller-supplied construction and destruction of the wrapped resource.

use async_trait::async_trait;

/// Acquire/release pair producing and tearing down one resource instance.
///
/// One factory value backs exactly one installed generation; the cell invokes
/// [`release`](Self::release) on the same factory that produced the resource,
/// after every reader of that generation is gone.
#[async_trait]
pub trait ResourceFactory: Send + Sync + 'static {
	/// Resource type handed out to readers.
	type Resource: Send + Sync + 'static;
	/// Failure type shared by both procedures.
	type Error: std::error::Error + Send + Sync + 'static;

	/// Produces the resource instance.
	///
	/// May suspend. A failure here propagates to the caller of the operation
	/// that requested the installation; nothing of the aborted installation
	/// becomes observable.
	async fn acquire(&self) -> Result<Self::Resource, Self::Error>;

	/// Tears the resource down.
	///
	/// Called at most once per installed generation, and only after all
	/// shared access to `resource` has ended. The value itself is dropped
	/// when the superseded generation's last reference goes away.
	async fn release(&self, resource: &Self::Resource) -> Result<(), Self::Error>;
}
