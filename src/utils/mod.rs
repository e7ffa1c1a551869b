pub mod time;

use nanoid::nanoid;

/// Generate a collision-resistant identifier for executions.
pub fn longid() -> String {
    nanoid!()
}
