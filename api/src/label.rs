use std::fmt;

pub const LABEL_PREFIX: &str = "webapp.guestbook.io";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuestBookLabel<'a>(&'a str);

impl<'a> GuestBookLabel<'a> {
    pub const fn borrow(name: &'a str) -> Self {
        Self(name)
    }
}

impl fmt::Display for GuestBookLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LABEL_PREFIX}/{}", self.0)
    }
}
