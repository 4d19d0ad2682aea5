/// Asserts that each of the `expected` fragments appears in `content`, in order.
///
/// Fragments may overlap line boundaries; searching resumes after the end of the previous match.
#[macro_export]
macro_rules! assert_contains_inorder {
    ($content:expr, [$($expected:expr),* $(,)?]) => {{
        let content: &str = $content.as_ref();
        let mut remainder: &str = content;
        $(
            let expected: &str = $expected;
            match remainder.find(expected) {
                Some(index) => remainder = &remainder[index + expected.len()..],
                None => panic!(
                    "expected content not found, or found out of order. expected: {:?}, remaining: {:?}",
                    expected, remainder
                ),
            }
        )*
    }};
}
