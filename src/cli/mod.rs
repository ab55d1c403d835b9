//! Terminal rendering for the interactive client: screens, menus and profile
//! records as ASCII tables. Pure string builders so they are testable.

use crate::identity::{Profile, Role};
use crate::navigation::Shell;
use crate::portal::{Navigation, NoticeLevel, Notification, Screen};

/// Render two-column rows as an ASCII table with a header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    // cap to keep output readable
    let max_col_width: usize = 60;
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h).min(max_col_width)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(widths.len()) {
            let w = display_len(cell);
            if w > widths[i] { widths[i] = w.min(max_col_width); }
        }
    }
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let sep = build_separator(&widths);
    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&build_row(&header_cells, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for r in rows {
        out.push_str(&build_row(r, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

pub fn render_profile(profile: &Profile, role: Role, media_url: &str) -> String {
    let mut rows: Vec<Vec<String>> = profile.display_rows(role).into_iter().map(|(k, v)| vec![k, v]).collect();
    if let Some(url) = profile.image_url(media_url) {
        rows.push(vec!["Photo".to_string(), url]);
    }
    render_table(&["Field", "Value"], &rows)
}

/// One-line menu bar; the selected entry is bracketed.
pub fn render_menu(shell: &Shell) -> String {
    shell
        .menu()
        .iter()
        .map(|e| if e.selected { format!("[{}]", e.label) } else { e.label.to_string() })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render_notification(n: &Notification) -> String {
    match n.level {
        NoticeLevel::Success => format!("ok: {}", n.message),
        NoticeLevel::Error => format!("error: {}", n.message),
    }
}

pub fn render_navigation(nav: &Navigation, media_url: &str) -> String {
    let mut out = String::new();
    if let Some(from) = &nav.redirected_from {
        out.push_str(&format!("(redirected from {})\n", from));
    }
    match &nav.screen {
        Screen::Login { role, from } => {
            out.push_str(&format!("{} Login  {}", role, nav.location));
            if let Some(f) = from {
                out.push_str(&format!("\nsign in to continue to {}", f));
            }
        }
        Screen::ForgetPassword { role } => out.push_str(&format!("{} password recovery  {}", role, nav.location)),
        Screen::UpdatePassword { role, reset_id } => {
            let who = role.map(|r| r.as_str()).unwrap_or("(unknown role)");
            out.push_str(&format!("Update password for {} reset link {}", who, reset_id));
        }
        Screen::Shell { shell, context } => {
            out.push_str(&format!("{} Dashboard  {}\n", shell.role(), nav.location));
            out.push_str(&render_menu(shell));
            if shell.is_home() {
                if let Some(p) = &context.profile {
                    out.push('\n');
                    out.push_str(&render_profile(p, context.role, media_url));
                }
            } else {
                out.push_str(&format!("\n{} screen", shell.page_label()));
            }
        }
        Screen::Profile { context } => {
            out.push_str(&format!("Profile ({})", context.role));
            if let Some(p) = &context.profile {
                out.push('\n');
                out.push_str(&render_profile(p, context.role, media_url));
            } else {
                out.push_str("\nprofile not loaded yet; run 'profile'");
            }
        }
        Screen::NotFound { location } => out.push_str(&format!("no screen at {}", location)),
    }
    out
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        s.push(' ');
        s.push_str(&text);
        s.push_str(&" ".repeat(w.saturating_sub(display_len(&text))));
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{RequestContext, Session};
    use crate::navigation::Location;

    #[test]
    fn table_layout() {
        let t = render_table(&["Field", "Value"], &[vec!["Name".into(), "Asha Rao".into()]]);
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "+-------+----------+");
        assert_eq!(lines[1], "| Field | Value    |");
        assert_eq!(lines[3], "| Name  | Asha Rao |");
    }

    #[test]
    fn truncates_long_cells() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn shell_screen_shows_menu_and_profile() {
        let shell = Shell::for_role(Role::Student, None);
        let session = Session {
            token: "t".into(),
            role: Role::Student,
            profile: Some(Profile { first_name: Some("Asha".into()), ..Default::default() }),
        };
        let nav = Navigation {
            screen: Screen::Shell { shell, context: RequestContext::new(session, Location::new("/student")) },
            location: Location::new("/student"),
            redirected_from: Some(Location::new("/admin")),
        };
        let text = render_navigation(&nav, "http://media");
        assert!(text.starts_with("(redirected from /admin)"));
        assert!(text.contains("[Home]  Timetable"));
        assert!(text.contains("| Name  | Asha  |"));
    }
}
