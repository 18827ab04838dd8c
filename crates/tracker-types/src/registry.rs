//! Registry trait for self-registering implementations.
//!
//! Each pluggable implementation (for example an index reader) declares the
//! name it is configured under and the factory that builds it.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// e.g. "subgraph" for `[index.implementations.subgraph]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
