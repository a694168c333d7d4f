pub mod guestbook;
