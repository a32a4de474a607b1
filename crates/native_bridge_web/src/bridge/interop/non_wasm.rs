use super::*;

fn unsupported() -> String {
    "the web channel is only available when compiled for wasm32".to_string()
}

pub fn host_global_present(_name: &str) -> bool {
    false
}

pub async fn open_channel(_name: &str) -> Result<(), String> {
    Err(unsupported())
}

pub fn spawn(task: impl std::future::Future<Output = ()> + 'static) {
    // No page event loop; nothing spawns here because no host global is ever reported.
    drop(task);
}

pub fn object_exists(_object: &str) -> bool {
    false
}

pub async fn invoke(_object: &str, _method: &str, _args: Vec<Value>) -> Result<Value, String> {
    Err(unsupported())
}

pub fn connect_signal(_object: &str, _signal: &str, _relay: SignalRelay) -> Result<(), String> {
    Err(unsupported())
}
