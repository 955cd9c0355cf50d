//! text formatting of names, fractions and base pair counts in the gather display

/// names longer than this are truncated
pub const NAME_DISPLAY_LENGTH: usize = 40;

const ELLIPSIS: &str = "...";

/// Keeps short names, cut longer ones to NAME_DISPLAY_LENGTH chars, ending with "...".
/// Lengths are counted in chars so we never split a multibyte character.
pub fn display_name(name: &str) -> String {
    if name.chars().count() <= NAME_DISPLAY_LENGTH {
        return name.to_string();
    }
    let kept = NAME_DISPLAY_LENGTH - ELLIPSIS.len();
    let mut disp: String = name.chars().take(kept).collect();
    disp.push_str(ELLIPSIS);
    disp
} // end of display_name

/// a fraction as a percentage with one decimal : 0.853 -> "85.3%"
pub fn percent(val: f64) -> String {
    format!("{:.1}%", 100. * val)
}

/// Pretty-print a base pair count. Counts below 10 kbp stay in bp,
/// larger units are used from half of the next one.
pub fn format_bp(bp: f64) -> String {
    if bp < 1e4 {
        format!("{:.0} bp", bp)
    } else if bp <= 500e3 {
        format!("{:.1} kbp", bp / 1e3)
    } else if bp < 500e6 {
        format!("{:.1} Mbp", bp / 1e6)
    } else if bp < 500e9 {
        format!("{:.1} Gbp", bp / 1e9)
    } else {
        // also reached by NaN
        String::from("???")
    }
} // end of format_bp

// end of mod tests
