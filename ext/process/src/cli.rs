//! Command-line invocation facts.

/// Final argument of the current invocation, if any argument followed the
/// program name.
#[must_use]
pub fn last_arg() -> Option<String> {
    last_arg_of(std::env::args())
}

/// Last element of an argument list, skipping the program name.
fn last_arg_of<I: Iterator<Item = String>>(args: I) -> Option<String> {
    args.skip(1).last()
}
