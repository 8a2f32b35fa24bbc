//! Image extension allow-list.

/// Extensions kept as-is; anything else is replaced by the default extension.
pub const IMAGE_EXTENSIONS: [&str; 14] = [
    "tif", "tiff", "gif", "jpeg", "jpg", "jif", "jfif", "jp2", "jpx", "j2k", "j2c", "fpx", "pcd",
    "png",
];

/// Case-insensitive membership test against [`IMAGE_EXTENSIONS`].
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext))
}

/// Ensures `name` ends in an allowed image extension.
///
/// The text after the last `.` is kept when allowed and replaced with
/// `default_ext` otherwise. A name without a dot gets `default_ext` appended.
pub fn with_image_extension(name: &str, default_ext: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            if is_image_extension(ext) {
                name.to_string()
            } else {
                format!("{stem}.{default_ext}")
            }
        }
        _ => format!("{name}.{default_ext}"),
    }
}
