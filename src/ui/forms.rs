//! Modal form state: the add-book and add-member input forms, the lend
//! picker, and the delete confirmations. Forms only hold and validate
//! input; submission and reloads belong to the application state machine.

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, Member};

/// Fields available within the add-book form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
}

/// Internal representation of the add-book form.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl BookForm {
    /// Swap focus between the title and author fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Title,
        };
    }

    /// Append a printable character to the active field.
    pub(crate) fn push_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        match self.active {
            BookField::Title => self.title.push(ch),
            BookField::Author => self.author.push(ch),
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
        }
    }

    /// Validate the inputs and return trimmed values ready for submission.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(anyhow!("Book author is required."));
        }
        Ok((title.to_string(), author.to_string()))
    }

    /// Render a single labeled line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let (value, is_active) = match field {
            BookField::Title => (&self.title, self.active == BookField::Title),
            BookField::Author => (&self.author, self.active == BookField::Author),
        };
        form_line(field_name, value, is_active)
    }
}

/// Fields available within the add-member form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum MemberField {
    #[default]
    Name,
    Email,
}

/// Internal representation of the add-member form.
#[derive(Default, Clone)]
pub(crate) struct MemberForm {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) active: MemberField,
    pub(crate) error: Option<String>,
}

impl MemberForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            MemberField::Name => MemberField::Email,
            MemberField::Email => MemberField::Name,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        match self.active {
            MemberField::Name => self.name.push(ch),
            MemberField::Email => self.email.push(ch),
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            MemberField::Name => {
                self.name.pop();
            }
            MemberField::Email => {
                self.email.pop();
            }
        }
    }

    /// Validate the inputs. The service does its own validation too; this
    /// only catches the obvious mistakes before a round trip.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Member name is required."));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(anyhow!("Member email is required."));
        }
        if !email.contains('@') {
            return Err(anyhow!("Member email must contain '@'."));
        }
        Ok((name.to_string(), email.to_string()))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: MemberField) -> Line<'static> {
        let (value, is_active) = match field {
            MemberField::Name => (&self.name, self.active == MemberField::Name),
            MemberField::Email => (&self.email, self.active == MemberField::Email),
        };
        form_line(field_name, value, is_active)
    }
}

fn form_line(field_name: &str, value: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Which column of the lend picker has focus.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum LendColumn {
    #[default]
    Books,
    Members,
}

/// State for the lend picker: one column of available books, one column of
/// members. Only books with copies on the shelf are offered.
#[derive(Clone)]
pub(crate) struct LendForm {
    pub(crate) books: Vec<Book>,
    pub(crate) members: Vec<Member>,
    pub(crate) active: LendColumn,
    pub(crate) book_selected: usize,
    pub(crate) member_selected: usize,
    pub(crate) error: Option<String>,
}

impl LendForm {
    /// Build the picker from the current mirror snapshot, optionally
    /// preselecting a book (used when lending straight off the books table).
    pub(crate) fn new(books: Vec<Book>, members: Vec<Member>, preselect: Option<&str>) -> Self {
        let book_selected = preselect
            .and_then(|id| books.iter().position(|book| book.id == id))
            .unwrap_or(0);
        Self {
            books,
            members,
            active: LendColumn::Books,
            book_selected,
            member_selected: 0,
            error: None,
        }
    }

    pub(crate) fn toggle_column(&mut self) {
        self.active = match self.active {
            LendColumn::Books => LendColumn::Members,
            LendColumn::Members => LendColumn::Books,
        };
    }

    /// Move the selection within the focused column, clamping at the ends.
    pub(crate) fn move_selection(&mut self, offset: isize) {
        let (selected, len) = match self.active {
            LendColumn::Books => (&mut self.book_selected, self.books.len()),
            LendColumn::Members => (&mut self.member_selected, self.members.len()),
        };
        if len == 0 {
            return;
        }
        let max = len as isize - 1;
        *selected = (*selected as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn selected_book(&self) -> Option<&Book> {
        self.books.get(self.book_selected)
    }

    pub(crate) fn selected_member(&self) -> Option<&Member> {
        self.members.get(self.member_selected)
    }

    /// Resolve the picked pair into identifiers ready for the lend call.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String)> {
        let book = self
            .selected_book()
            .ok_or_else(|| anyhow!("No books are available to lend."))?;
        let member = self
            .selected_member()
            .ok_or_else(|| anyhow!("No members are registered yet."))?;
        Ok((book.id.clone(), member.id.clone()))
    }
}

/// Confirmation state before a book is deleted.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: String,
    pub(crate) title: String,
}

/// Confirmation state before a member is deleted.
#[derive(Clone)]
pub(crate) struct ConfirmMemberDelete {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "A".to_string(),
            available: true,
            quantity: 1,
        }
    }

    fn member(id: &str, name: &str) -> Member {
        Member {
            id: id.to_string(),
            name: name.to_string(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_book_form_requires_both_fields() {
        let mut form = BookForm::default();
        assert!(form.parse_inputs().is_err());

        for ch in "Dune".chars() {
            form.push_char(ch);
        }
        assert!(form.parse_inputs().is_err());

        form.toggle_field();
        for ch in "Herbert".chars() {
            form.push_char(ch);
        }
        let (title, author) = form.parse_inputs().unwrap();
        assert_eq!(title, "Dune");
        assert_eq!(author, "Herbert");
    }

    #[test]
    fn test_book_form_ignores_control_characters() {
        let mut form = BookForm::default();
        form.push_char('\t');
        form.push_char('D');
        assert_eq!(form.title, "D");
        form.backspace();
        assert_eq!(form.title, "");
    }

    #[test]
    fn test_member_form_validates_email_shape() {
        let mut form = MemberForm::default();
        for ch in "Alice".chars() {
            form.push_char(ch);
        }
        form.toggle_field();
        for ch in "not-an-email".chars() {
            form.push_char(ch);
        }
        assert!(form.parse_inputs().is_err());

        form.push_char('@');
        form.push_char('x');
        assert!(form.parse_inputs().is_ok());
    }

    #[test]
    fn test_lend_form_preselects_requested_book() {
        let form = LendForm::new(
            vec![book("b1", "Dune"), book("b2", "Emma")],
            vec![member("m1", "Alice")],
            Some("b2"),
        );
        assert_eq!(form.selected_book().unwrap().id, "b2");
    }

    #[test]
    fn test_lend_form_selection_clamps_at_both_ends() {
        let mut form = LendForm::new(
            vec![book("b1", "Dune"), book("b2", "Emma")],
            vec![member("m1", "Alice")],
            None,
        );
        form.move_selection(-3);
        assert_eq!(form.book_selected, 0);
        form.move_selection(10);
        assert_eq!(form.book_selected, 1);

        form.toggle_column();
        form.move_selection(5);
        assert_eq!(form.member_selected, 0);
    }

    #[test]
    fn test_lend_form_rejects_empty_columns() {
        let no_books = LendForm::new(Vec::new(), vec![member("m1", "Alice")], None);
        assert!(no_books.parse_inputs().is_err());

        let no_members = LendForm::new(vec![book("b1", "Dune")], Vec::new(), None);
        assert!(no_members.parse_inputs().is_err());

        let ready = LendForm::new(vec![book("b1", "Dune")], vec![member("m1", "Alice")], None);
        assert_eq!(
            ready.parse_inputs().unwrap(),
            ("b1".to_string(), "m1".to_string())
        );
    }
}
