pub mod admin;
pub mod reports;
pub mod reviews;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    reviews::configure(conf);
    reports::configure(conf);
    admin::configure(conf);
}
