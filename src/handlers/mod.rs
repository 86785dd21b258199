// Route handlers. Public: `/`. Protected by the bearer middleware: `/images`.
pub mod home;
pub mod images;

pub use home::home;
pub use images::list_images;
