//! Role shells and their menus. Each role has its own page enum, and `Shell`
//! tags which one is active, so dispatch is an exhaustive match instead of a
//! string comparison on the role name.

use crate::identity::Role;

use super::location::Location;

macro_rules! menu_pages {
    ($name:ident { $($variant:ident => ($id:literal, $label:literal)),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn id(&self) -> &'static str {
                match self { $($name::$variant => $id),+ }
            }

            pub fn label(&self) -> &'static str {
                match self { $($name::$variant => $label),+ }
            }

            /// Case-insensitive lookup by id; unknown ids yield `None`.
            pub fn from_id(id: &str) -> Option<Self> {
                let id = id.trim();
                Self::ALL.iter().copied().find(|p| p.id().eq_ignore_ascii_case(id))
            }
        }
    };
}

menu_pages!(AdminPage {
    Home => ("home", "Home"),
    Student => ("student", "Student"),
    Faculty => ("faculty", "Faculty"),
    Branch => ("branch", "Branch"),
    Notice => ("notice", "Notice"),
    Exam => ("exam", "Exam"),
    Subjects => ("subjects", "Subjects"),
    Admin => ("admin", "Admin"),
});

menu_pages!(FacultyPage {
    Home => ("home", "Home"),
    Timetable => ("timetable", "Timetable"),
    Material => ("material", "Material"),
    Notice => ("notice", "Notice"),
    StudentInfo => ("student info", "Student Info"),
    Marks => ("marks", "Marks"),
    Exam => ("exam", "Exam"),
});

menu_pages!(StudentPage {
    Home => ("home", "Home"),
    Timetable => ("timetable", "Timetable"),
    Material => ("material", "Material"),
    Notice => ("notice", "Notice"),
    Exam => ("exam", "Exam"),
    Marks => ("marks", "Marks"),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// The layout a signed-in role lands in, with its selected menu page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Admin(AdminPage),
    Faculty(FacultyPage),
    Student(StudentPage),
}

impl Shell {
    /// Shell for `role` with `page` selected. Absent or unknown ids select home.
    pub fn for_role(role: Role, page: Option<&str>) -> Self {
        let page = page.unwrap_or("home");
        match role {
            Role::Admin => Shell::Admin(AdminPage::from_id(page).unwrap_or(AdminPage::Home)),
            Role::Faculty => Shell::Faculty(FacultyPage::from_id(page).unwrap_or(FacultyPage::Home)),
            Role::Student => Shell::Student(StudentPage::from_id(page).unwrap_or(StudentPage::Home)),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Shell::Admin(_) => Role::Admin,
            Shell::Faculty(_) => Role::Faculty,
            Shell::Student(_) => Role::Student,
        }
    }

    pub fn page_id(&self) -> &'static str {
        match self {
            Shell::Admin(p) => p.id(),
            Shell::Faculty(p) => p.id(),
            Shell::Student(p) => p.id(),
        }
    }

    pub fn page_label(&self) -> &'static str {
        match self {
            Shell::Admin(p) => p.label(),
            Shell::Faculty(p) => p.label(),
            Shell::Student(p) => p.label(),
        }
    }

    /// The home page shows the cached profile instead of a sub-screen.
    pub fn is_home(&self) -> bool {
        self.page_id() == "home"
    }

    pub fn menu(&self) -> Vec<MenuEntry> {
        let current = self.page_id();
        let entries: Vec<(&'static str, &'static str)> = match self {
            Shell::Admin(_) => AdminPage::ALL.iter().map(|p| (p.id(), p.label())).collect(),
            Shell::Faculty(_) => FacultyPage::ALL.iter().map(|p| (p.id(), p.label())).collect(),
            Shell::Student(_) => StudentPage::ALL.iter().map(|p| (p.id(), p.label())).collect(),
        };
        entries
            .into_iter()
            .map(|(id, label)| MenuEntry { id, label, selected: id == current })
            .collect()
    }

    /// Switch to another page of the same shell; unknown ids fall back to home.
    pub fn select(&self, page: &str) -> Self {
        Shell::for_role(self.role(), Some(page))
    }

    /// Location that reopens this shell on its current page (`/admin?page=branch`).
    pub fn location(&self) -> Location {
        Location::new(self.role().home_path()).with_param("page", self.page_id())
    }
}
