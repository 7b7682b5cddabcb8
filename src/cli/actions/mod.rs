pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        frontend_base_url: String,
        reset_ttl_hours: i64,
    },
}
