pub mod geom;
pub mod history;
pub mod media;
pub mod model;
pub mod normalize;
pub mod overlay;
pub mod report_text;
pub mod scenario;
pub mod session;
pub mod store;
pub mod users;
