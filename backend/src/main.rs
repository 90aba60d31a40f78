#[macro_use]
extern crate rocket;

use compare_backend::build_rocket;
use compare_backend::config::{init_logger, load_environment, Settings};
use log::error;

#[launch]
fn rocket() -> _ {
    load_environment();
    init_logger();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Error: {e}");
            std::process::exit(1);
        }
    };

    match build_rocket(&settings) {
        Ok(rocket) => rocket,
        Err(e) => {
            error!("Failed to build Rocket instance: {e:?}");
            std::process::exit(1);
        }
    }
}
