//! Built-in message bundles for the books pages.

use bookshelf_kernel::BundleMessageSource;

pub const SAVE_SUCCESS: &str = "book_save_success";
pub const SAVE_FAIL: &str = "book_save_fail";

/// Bundles shipped with the binary; a configured bundle dir overlays them.
pub fn builtin() -> BundleMessageSource {
    BundleMessageSource::new("en")
        .with_bundle(
            "en",
            [
                (SAVE_SUCCESS, "Book saved."),
                (SAVE_FAIL, "The book could not be saved. Please correct the errors below."),
            ],
        )
        .with_bundle(
            "de",
            [
                (SAVE_SUCCESS, "Buch gespeichert."),
                (
                    SAVE_FAIL,
                    "Das Buch konnte nicht gespeichert werden. Bitte korrigieren Sie die Fehler.",
                ),
            ],
        )
}
