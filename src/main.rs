mod app;
mod entry;
mod logger;
mod shutdown_handlers;

use rowburst::error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
