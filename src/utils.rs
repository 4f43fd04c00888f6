//! Utility functions for file naming

/// Characters that are not allowed in file names on common filesystems
const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a title safe to use as a file name
///
/// Each of `< > : " / \ | ? *` becomes `_`, then surrounding whitespace is trimmed.
///
/// # Examples
///
/// ```
/// use bili_audio_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("A:B/C"), "A_B_C");
/// assert_eq!(sanitize_filename("  hello world  "), "hello world");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name for a downloaded audio track: `{title}_p{page+1}_{quality}.m4a`
///
/// `page_index` is zero-based; the file name uses the one-based page number.
pub fn audio_file_name(title: &str, page_index: usize, quality_label: &str) -> String {
    format!(
        "{}_p{}_{}.m4a",
        sanitize_filename(title),
        page_index + 1,
        quality_label
    )
}
