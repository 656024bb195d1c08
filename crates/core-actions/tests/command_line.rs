mod common;

use common::Session;
use core_actions::io_ops::open_file;
use core_state::Mode;

#[test]
fn search_next_wraps_with_one_notice() {
    let mut s = Session::new("foo bar\nbaz bar");
    s.keys("/bar<CR>");
    assert_eq!(s.cursor(), (0, 4));
    assert_eq!(s.status(), None);
    s.keys("n");
    assert_eq!(s.cursor(), (1, 4));
    assert_eq!(s.status(), None);
    s.keys("n");
    assert_eq!(s.cursor(), (0, 4));
    assert_eq!(s.status(), Some("search hit BOTTOM, continuing at TOP"));
}

#[test]
fn backward_search_wraps_to_bottom() {
    let mut s = Session::new("foo bar\nbaz bar");
    s.keys("?bar<CR>");
    assert_eq!(s.cursor(), (1, 4));
    assert_eq!(s.status(), Some("search hit TOP, continuing at BOTTOM"));
    s.keys("N");
    assert_eq!(s.cursor(), (0, 4));
}

#[test]
fn search_uses_regex_syntax() {
    let mut s = Session::new("cat\ncot cut");
    s.keys("/c.t<CR>");
    assert_eq!(s.cursor(), (0, 0));
    s.keys("n");
    assert_eq!(s.cursor(), (1, 0));
    s.keys("n");
    assert_eq!(s.cursor(), (1, 4));
}

#[test]
fn search_matches_at_cursor_without_wrapping() {
    let mut s = Session::new("foo bar");
    s.keys("/foo<CR>");
    assert_eq!(s.cursor(), (0, 0));
    assert_eq!(s.status(), None);
}

#[test]
fn empty_pattern_reuses_last_search() {
    let mut s = Session::new("x\nab ab");
    s.keys("/<CR>");
    assert_eq!(s.status(), Some("No previous search pattern"));
    s.keys("/ab<CR>");
    assert_eq!(s.cursor(), (1, 0));
    s.keys("/<CR>");
    assert_eq!(s.cursor(), (1, 3));
}

#[test]
fn invalid_pattern_is_reported() {
    let mut s = Session::new("abc");
    s.keys("/[<CR>");
    assert_eq!(s.status(), Some("Invalid pattern: ["));
    assert_eq!(s.model.state().mode, Mode::Command);
}

#[test]
fn escape_discards_command_line() {
    let mut s = Session::new("abc");
    s.keys(":q<Esc>");
    assert!(!s.quit);
    assert_eq!(s.model.state().mode, Mode::Command);
    assert!(!s.model.state().command_line.is_active());
    s.keys(":q<C-c>");
    assert!(!s.quit);
}

#[test]
fn quit_guard_and_force() {
    let mut s = Session::new("abc");
    s.keys("x:q<CR>");
    assert!(!s.quit);
    assert_eq!(s.status(), Some("Unsaved changes (add ! to override)"));
    s.keys(":q!<CR>");
    assert!(s.quit);
}

#[test]
fn undo_back_to_save_point_allows_quit() {
    let mut s = Session::new("abc");
    s.keys("xu:q<CR>");
    assert!(s.quit);
}

#[test]
fn write_then_quit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");
    std::fs::write(&path, "hello\r\nworld\r\n").unwrap();
    let mut s = Session::from_state(open_file(&path).unwrap().into_state());
    s.keys("x:w<CR>");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "ello\r\nworld\r\n");
    assert!(s.status().unwrap().ends_with("2L, 13B written"));
    s.keys(":q<CR>");
    assert!(s.quit);
}

#[test]
fn write_with_two_names_is_rejected() {
    let mut s = Session::new("abc");
    s.keys(":w a b<CR>");
    assert_eq!(s.status(), Some("Too many file names"));
}

#[test]
fn unknown_command_is_reported() {
    let mut s = Session::new("abc");
    s.keys(":zz<CR>");
    assert_eq!(s.status(), Some("Not an editor command: zz"));
}

#[test]
fn command_line_backspace() {
    let mut s = Session::new("abc");
    s.keys(":qx<BS>");
    assert_eq!(s.model.state().command_line.buffer(), ":q");
    s.keys("<BS><BS>");
    assert_eq!(s.model.state().mode, Mode::Command);
    s.keys("l");
    assert_eq!(s.cursor(), (0, 1));
}

#[test]
fn line_number_toggle() {
    let mut s = Session::new("abc");
    s.keys(":nu<CR>");
    assert!(s.model.state().show_line_numbers);
    s.keys(":nonu<CR>");
    assert!(!s.model.state().show_line_numbers);
}
