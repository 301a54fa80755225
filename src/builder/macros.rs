//! Macros for concise flow declarations.

/// Declare a [`FlowDefinition`](crate::core::FlowDefinition) inline.
///
/// # Example
///
/// ```
/// use backstack::flow;
///
/// let pay = flow!("pay" => ["Input", "Detail", "Confirm"]);
/// assert_eq!(pay.name, "pay");
/// assert_eq!(pay.steps.len(), 3);
/// ```
#[macro_export]
macro_rules! flow {
    ($name:expr => [$($step:expr),* $(,)?]) => {
        $crate::core::FlowDefinition::new(
            $name,
            ::std::vec::Vec::<::std::string::String>::from([
                $(::std::string::String::from($step)),*
            ]),
        )
    };
}
