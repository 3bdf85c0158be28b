/*!

  Utils for breadboard development.

*/

/// The positional fallback label for the `position`th unnamed source:
/// A through Z, then A26, A27, …
pub fn ordinal_name(position: usize) -> String {
    const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    match LETTERS.get(position) {
        Some(&letter) => (letter as char).to_string(),
        None => format!("A{position}"),
    }
}

/// Compare rendered text as strings up to indentation.
#[macro_export]
macro_rules! assert_render_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                assert_eq!(left_val.lines().count(), right_val.lines().count());
                for (left_line, right_line) in left_val.lines().zip(right_val.lines()) {
                    assert_eq!(left_line.trim(), right_line.trim());
                }
            }
        }
    };
}
