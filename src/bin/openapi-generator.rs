//! Print the OpenAPI document for the leaderboard backend to stdout.

use leaderboard_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    println!("{}", doc.to_pretty_json().unwrap());
}
