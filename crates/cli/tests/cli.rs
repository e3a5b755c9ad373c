use assert_cmd::Command;
use predicates::str::contains;

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-cli").unwrap();
    cmd.env("BOOKSHELF_DATABASE__URL", "sqlite::memory:")
        .env("BOOKSHELF_DATABASE__MAX_CONNECTIONS", "1")
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn help_lists_subcommands() {
    bookshelf()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("serve"))
        .stdout(contains("migrate"));
}

#[test]
fn migrate_applies_book_schema() {
    bookshelf()
        .arg("migrate")
        .assert()
        .success()
        .stdout(contains("applied 2 migration(s)"));
}

#[test]
fn unknown_environment_fails() {
    bookshelf()
        .env("BOOKSHELF_ENV", "moon")
        .arg("migrate")
        .assert()
        .failure();
}

#[test]
fn zero_default_page_size_is_rejected_at_startup() {
    bookshelf()
        .env("BOOKSHELF_BOOKS__DEFAULT_PAGE_SIZE", "0")
        .arg("migrate")
        .assert()
        .failure()
        .stderr(contains("invalid [books] configuration"));
}
