use js_sys::{Array, Promise};
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::*;

#[wasm_bindgen(inline_js = r#"
let channelObjects = null;

function fail(message) {
  throw new Error(message);
}

function hostObject(name) {
  if (!channelObjects) fail('web channel is not open');
  const target = channelObjects[name];
  if (target === undefined || target === null) fail(`unknown object \`${name}\``);
  return target;
}

export function jsOpenChannel(globalName) {
  return new Promise((resolve, reject) => {
    const host = globalThis[globalName];
    if (!host || !host.webChannelTransport) {
      reject(new Error(`global \`${globalName}\` exposes no web channel transport`));
      return;
    }
    if (typeof QWebChannel === 'undefined') {
      reject(new Error('QWebChannel is not loaded'));
      return;
    }
    try {
      new QWebChannel(host.webChannelTransport, (channel) => {
        channelObjects = channel.objects || {};
        resolve(null);
      });
    } catch (err) {
      reject(err);
    }
  });
}

export function jsObjectExists(name) {
  return !!channelObjects && channelObjects[name] !== undefined && channelObjects[name] !== null;
}

export function jsInvoke(object, method, args) {
  return new Promise((resolve, reject) => {
    try {
      const target = hostObject(object);
      const fn = target[method];
      if (typeof fn !== 'function') fail(`unknown method \`${object}.${method}\``);
      fn.apply(target, [...args, (result) => resolve(result === undefined ? null : result)]);
    } catch (err) {
      reject(err);
    }
  });
}

export function jsConnectSignal(object, signal, relay) {
  const target = hostObject(object);
  const hook = target[signal];
  if (!hook || typeof hook.connect !== 'function') fail(`unknown signal \`${object}.${signal}\``);
  hook.connect((...args) => relay(args));
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = jsOpenChannel)]
    fn js_open_channel(global_name: &str) -> Promise;
    #[wasm_bindgen(js_name = jsObjectExists)]
    fn js_object_exists(name: &str) -> bool;
    #[wasm_bindgen(js_name = jsInvoke)]
    fn js_invoke(object: &str, method: &str, args: JsValue) -> Promise;
    #[wasm_bindgen(catch, js_name = jsConnectSignal)]
    fn js_connect_signal(
        object: &str,
        signal: &str,
        relay: &Closure<dyn Fn(Array)>,
    ) -> Result<(), JsValue>;
}

async fn await_promise(promise: Promise) -> Result<JsValue, String> {
    JsFuture::from(promise).await.map_err(js_error_to_string)
}

fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}

pub fn host_global_present(name: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    js_sys::Reflect::get(&window, &JsValue::from_str(name))
        .map(|value| !value.is_undefined() && !value.is_null())
        .unwrap_or(false)
}

pub async fn open_channel(name: &str) -> Result<(), String> {
    await_promise(js_open_channel(name)).await.map(|_| ())
}

pub fn spawn(task: impl std::future::Future<Output = ()> + 'static) {
    wasm_bindgen_futures::spawn_local(task);
}

pub fn object_exists(object: &str) -> bool {
    js_object_exists(object)
}

pub async fn invoke(object: &str, method: &str, args: Vec<Value>) -> Result<Value, String> {
    let args = args
        .serialize(&Serializer::json_compatible())
        .map_err(|e| e.to_string())?;
    let reply = await_promise(js_invoke(object, method, args)).await?;
    if reply.is_null() || reply.is_undefined() {
        return Ok(Value::Null);
    }
    from_value(reply).map_err(|e| e.to_string())
}

pub fn connect_signal(object: &str, signal: &str, relay: SignalRelay) -> Result<(), String> {
    let object_name = object.to_string();
    let signal_name = signal.to_string();
    let closure = Closure::<dyn Fn(Array)>::new(move |args: Array| {
        match from_value::<Vec<Value>>(args.into()) {
            Ok(values) => relay(&values),
            Err(err) => tracing::warn!(
                object = %object_name,
                signal = %signal_name,
                error = %err,
                "dropping undecodable signal payload"
            ),
        }
    });
    js_connect_signal(object, signal, &closure).map_err(js_error_to_string)?;
    // The host keeps the relay for the lifetime of the page.
    closure.forget();
    Ok(())
}
