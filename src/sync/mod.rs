mod conn;

pub use conn::Conn;
