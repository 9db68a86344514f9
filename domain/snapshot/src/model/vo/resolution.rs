/// Outcome of one tier of snapshot class resolution.
#[derive(Debug)]
pub enum Resolution<T, E> {
    /// This tier decided; stop and return the value.
    Use(T),
    /// This tier has nothing to say; ask the next one.
    FallThrough,
    /// This tier decided the resolution cannot succeed.
    Fail(E),
}

