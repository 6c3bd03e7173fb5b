// Android side of the host seam.
//
// MainActivity owns the platform callbacks (onRequestPermissionsResult,
// onActivityResult) and queues each reply as a single text line; this module
// drains that queue over JNI and turns the lines into [`HostEvent`]s. The
// line format is small enough to parse by hand:
//
//   perm:<code>:granted        perm:<code>:denied
//   result:<code>:ok[:<uri>]   result:<code>:cancelled

use crate::host::{ActivityOutcome, HostEvent};
use crate::models::ImageUri;

#[cfg(target_os = "android")]
use crate::host::Host;
#[cfg(target_os = "android")]
use jni::objects::{JClass, JObject, JString, JValue};
#[cfg(target_os = "android")]
use ndk_context::android_context;
#[cfg(target_os = "android")]
use std::path::Path;

/// Fully qualified MainActivity class in slash format.
const DEFAULT_MAIN_ACTIVITY_CLASS: &str = "dev/dioxus/main/MainActivity";

#[derive(Debug, Clone)]
pub enum BridgeError {
    Jni(String),
    ActivityUnavailable(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::Jni(msg) => write!(f, "JNI error: {}", msg),
            BridgeError::ActivityUnavailable(msg) => write!(f, "Activity unavailable: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Configuration for the Android host
///
/// This allows customization of the MainActivity class name for different apps.
#[derive(Debug, Clone)]
pub struct AndroidHostConfig {
    /// Fully qualified class name in slash format (e.g., "com/example/myapp/MainActivity")
    pub main_activity_class: String,
}

impl Default for AndroidHostConfig {
    fn default() -> Self {
        Self {
            main_activity_class: DEFAULT_MAIN_ACTIVITY_CLASS.to_string(),
        }
    }
}

/// Parses one queued bridge line into a [`HostEvent`].
///
/// Returns `None` for anything that does not match the line format; the
/// caller logs and drops such lines. A missing or empty URI tail on an "ok"
/// result maps to `uri: None`.
pub fn parse_bridge_event(line: &str) -> Option<HostEvent> {
    let line = line.trim();
    let (kind, rest) = line.split_once(':')?;
    match kind {
        "perm" => {
            let (code, verdict) = rest.split_once(':')?;
            let request_code = code.parse().ok()?;
            let granted = match verdict {
                "granted" => true,
                "denied" => false,
                _ => return None,
            };
            Some(HostEvent::PermissionResult {
                request_code,
                granted,
            })
        }
        "result" => {
            let (code, rest) = rest.split_once(':')?;
            let request_code = code.parse().ok()?;
            // Only the outcome is split off; a URI tail may itself contain ':'.
            let (outcome, uri) = match rest.split_once(':') {
                Some((outcome, tail)) => (outcome, Some(tail)),
                None => (rest, None),
            };
            let outcome = match outcome {
                "ok" => ActivityOutcome::Ok,
                "cancelled" => ActivityOutcome::Cancelled,
                _ => return None,
            };
            let uri = uri.filter(|u| !u.is_empty()).map(ImageUri::new);
            Some(HostEvent::ActivityResult {
                request_code,
                outcome,
                uri,
            })
        }
        _ => None,
    }
}

#[cfg(target_os = "android")]
fn attach_vm() -> Result<jni::JavaVM, BridgeError> {
    let vm_ptr = android_context().vm() as *mut *const jni::sys::JNIInvokeInterface_;
    unsafe { jni::JavaVM::from_raw(vm_ptr) }
        .map_err(|e| BridgeError::Jni(format!("JavaVM failed: {}", e)))
}

#[cfg(target_os = "android")]
fn get_app_class_loader<'a>(env: &mut jni::JNIEnv<'a>) -> Result<JObject<'a>, BridgeError> {
    // ActivityThread.currentActivityThread()
    let at_cls = env
        .find_class("android/app/ActivityThread")
        .map_err(|e| BridgeError::Jni(format!("ActivityThread not found: {}", e)))?;
    let at = env
        .call_static_method(
            &at_cls,
            "currentActivityThread",
            "()Landroid/app/ActivityThread;",
            &[],
        )
        .map_err(|e| BridgeError::Jni(format!("currentActivityThread failed: {}", e)))?
        .l()
        .map_err(|e| BridgeError::Jni(format!("currentActivityThread invalid: {}", e)))?;

    // Prefer application class loader
    let app = env
        .call_method(&at, "getApplication", "()Landroid/app/Application;", &[])
        .map_err(|e| BridgeError::Jni(format!("getApplication failed: {}", e)))?
        .l()
        .map_err(|e| BridgeError::Jni(format!("getApplication invalid: {}", e)))?;

    if app.is_null() {
        // Fallback: system context
        let sys_ctx = env
            .call_method(&at, "getSystemContext", "()Landroid/app/ContextImpl;", &[])
            .map_err(|e| BridgeError::Jni(format!("getSystemContext failed: {}", e)))?
            .l()
            .map_err(|e| BridgeError::Jni(format!("getSystemContext invalid: {}", e)))?;
        let loader = env
            .call_method(&sys_ctx, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
            .map_err(|e| BridgeError::Jni(format!("getClassLoader (sys) failed: {}", e)))?
            .l()
            .map_err(|e| BridgeError::Jni(format!("getClassLoader (sys) invalid: {}", e)))?;
        return Ok(loader);
    }

    let loader = env
        .call_method(&app, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .map_err(|e| BridgeError::Jni(format!("getClassLoader failed: {}", e)))?
        .l()
        .map_err(|e| BridgeError::Jni(format!("getClassLoader invalid: {}", e)))?;
    Ok(loader)
}

#[cfg(target_os = "android")]
fn load_class<'a>(
    env: &mut jni::JNIEnv<'a>,
    loader: &JObject<'a>,
    fq_slash: &str,
) -> Result<JClass<'a>, BridgeError> {
    // ClassLoader.loadClass wants dot notation
    let fq_dot = fq_slash.replace('/', ".");
    let name: JString = env
        .new_string(fq_dot)
        .map_err(|e| BridgeError::Jni(format!("new_string failed: {}", e)))?;
    let cls_obj = env
        .call_method(
            loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&JObject::from(name))],
        )
        .map_err(|e| BridgeError::Jni(format!("ClassLoader.loadClass failed: {}", e)))?
        .l()
        .map_err(|e| BridgeError::Jni(format!("loadClass invalid: {}", e)))?;
    Ok(JClass::from(cls_obj))
}

#[cfg(target_os = "android")]
fn companion_instance<'a>(
    env: &mut jni::JNIEnv<'a>,
    cls: &JClass<'a>,
    config: &AndroidHostConfig,
    signature: &str,
) -> Result<JObject<'a>, BridgeError> {
    let comp_signature = format!("L{}$Companion;", config.main_activity_class);
    let comp_obj = env
        .get_static_field(cls, "Companion", &comp_signature)
        .map_err(|e| BridgeError::ActivityUnavailable(format!("Companion field missing: {}", e)))?
        .l()
        .map_err(|e| BridgeError::ActivityUnavailable(format!("Companion field invalid: {}", e)))?;

    if comp_obj.is_null() {
        return Err(BridgeError::ActivityUnavailable(
            "MainActivity.Companion is null - activity not initialized?".to_string(),
        ));
    }

    env.call_method(&comp_obj, "getInstance", signature, &[])
        .map_err(|e| {
            BridgeError::ActivityUnavailable(format!("Companion.getInstance() failed: {}", e))
        })?
        .l()
        .map_err(|e| {
            BridgeError::ActivityUnavailable(format!(
                "Companion.getInstance() returned invalid object: {}",
                e
            ))
        })
}

#[cfg(target_os = "android")]
fn get_activity_instance<'a>(
    env: &mut jni::JNIEnv<'a>,
    config: &AndroidHostConfig,
) -> Result<(JObject<'a>, JClass<'a>), BridgeError> {
    let loader = get_app_class_loader(env)?;
    let cls = load_class(env, &loader, &config.main_activity_class)?;

    let signature = format!("()L{};", config.main_activity_class);

    // Primary attempt: static helper generated by `@JvmStatic`
    let instance = match env.call_static_method(&cls, "getInstance", &signature, &[]) {
        Ok(val) => val.l().map_err(|e| {
            BridgeError::ActivityUnavailable(format!(
                "getInstance() returned invalid object: {}",
                e
            ))
        })?,
        Err(_err) => {
            // Clear any pending Java exception
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }

            // Try the static `instance` field, then the Kotlin Companion
            let field_signature = format!("L{};", config.main_activity_class);
            match env.get_static_field(&cls, "instance", &field_signature) {
                Ok(field) => {
                    let inst = field.l().map_err(|e| {
                        BridgeError::ActivityUnavailable(format!("instance field invalid: {}", e))
                    })?;
                    if inst.is_null() {
                        companion_instance(env, &cls, config, &signature)?
                    } else {
                        inst
                    }
                }
                Err(_) => {
                    if env.exception_check().unwrap_or(false) {
                        let _ = env.exception_clear();
                    }
                    companion_instance(env, &cls, config, &signature)?
                }
            }
        }
    };

    if instance.is_null() {
        return Err(BridgeError::ActivityUnavailable(
            "MainActivity instance is null - activity not initialized?".to_string(),
        ));
    }

    Ok((instance, cls))
}

/// JNI-backed [`Host`] talking to the app's MainActivity.
///
/// Every call attaches the current thread and resolves the activity fresh;
/// nothing JNI-scoped is held across calls, so the host can live inside an
/// async task. Failures are logged and degrade to the safe answer (no
/// permission, no camera, no event).
#[cfg(target_os = "android")]
pub struct AndroidHost {
    config: AndroidHostConfig,
}

#[cfg(target_os = "android")]
impl AndroidHost {
    pub fn new() -> Self {
        Self::with_config(AndroidHostConfig::default())
    }

    pub fn with_config(config: AndroidHostConfig) -> Self {
        Self { config }
    }

    fn call_bool(&self, name: &str) -> Result<bool, BridgeError> {
        let vm = attach_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Jni(format!("JNI attach failed: {}", e)))?;
        let (activity, _cls) = get_activity_instance(&mut env, &self.config)?;

        env.call_method(&activity, name, "()Z", &[])
            .map_err(|e| BridgeError::Jni(format!("{} failed: {}", name, e)))?
            .z()
            .map_err(|e| BridgeError::Jni(format!("Boolean conversion failed: {}", e)))
    }

    fn call_with_string(&self, name: &str, arg: &str) -> Result<(), BridgeError> {
        let vm = attach_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Jni(format!("JNI attach failed: {}", e)))?;
        let (activity, _cls) = get_activity_instance(&mut env, &self.config)?;

        let jarg: JString = env
            .new_string(arg)
            .map_err(|e| BridgeError::Jni(format!("new_string failed: {}", e)))?;
        env.call_method(
            &activity,
            name,
            "(Ljava/lang/String;)V",
            &[JValue::Object(&JObject::from(jarg))],
        )
        .map_err(|e| BridgeError::Jni(format!("{} failed: {}", name, e)))?;
        Ok(())
    }

    fn call_dispatch(&self, name: &str, arg: &str, request_code: u32) -> Result<(), BridgeError> {
        let vm = attach_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Jni(format!("JNI attach failed: {}", e)))?;
        let (activity, _cls) = get_activity_instance(&mut env, &self.config)?;

        let jarg: JString = env
            .new_string(arg)
            .map_err(|e| BridgeError::Jni(format!("new_string failed: {}", e)))?;
        env.call_method(
            &activity,
            name,
            "(Ljava/lang/String;I)V",
            &[
                JValue::Object(&JObject::from(jarg)),
                JValue::Int(request_code as i32),
            ],
        )
        .map_err(|e| BridgeError::Jni(format!("{} failed: {}", name, e)))?;
        Ok(())
    }

    fn call_with_int(&self, name: &str, value: i32) -> Result<(), BridgeError> {
        let vm = attach_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Jni(format!("JNI attach failed: {}", e)))?;
        let (activity, _cls) = get_activity_instance(&mut env, &self.config)?;

        env.call_method(&activity, name, "(I)V", &[JValue::Int(value)])
            .map_err(|e| BridgeError::Jni(format!("{} failed: {}", name, e)))?;
        Ok(())
    }

    fn scan_media_file(&self, path: &str, mime: &str) -> Result<(), BridgeError> {
        let vm = attach_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Jni(format!("JNI attach failed: {}", e)))?;
        let (activity, _cls) = get_activity_instance(&mut env, &self.config)?;

        let jpath: JString = env
            .new_string(path)
            .map_err(|e| BridgeError::Jni(format!("new_string failed: {}", e)))?;
        let jmime: JString = env
            .new_string(mime)
            .map_err(|e| BridgeError::Jni(format!("new_string failed: {}", e)))?;
        env.call_method(
            &activity,
            "scanMediaFile",
            "(Ljava/lang/String;Ljava/lang/String;)V",
            &[
                JValue::Object(&JObject::from(jpath)),
                JValue::Object(&JObject::from(jmime)),
            ],
        )
        .map_err(|e| BridgeError::Jni(format!("scanMediaFile failed: {}", e)))?;
        Ok(())
    }

    /// Pops the next queued bridge line, if any. The Java side removes the
    /// line atomically so nothing is lost between polls.
    fn take_event_line(&self) -> Result<Option<String>, BridgeError> {
        let vm = attach_vm()?;
        let mut env = vm
            .attach_current_thread()
            .map_err(|e| BridgeError::Jni(format!("JNI attach failed: {}", e)))?;
        let loader = get_app_class_loader(&mut env)?;
        let cls = load_class(&mut env, &loader, &self.config.main_activity_class)?;

        let result = env
            .call_static_method(&cls, "takePendingEvent", "()Ljava/lang/String;", &[])
            .map_err(|e| BridgeError::Jni(format!("takePendingEvent failed: {}", e)))?;
        let obj = result
            .l()
            .map_err(|e| BridgeError::Jni(format!("takePendingEvent invalid: {}", e)))?;
        if obj.is_null() {
            return Ok(None);
        }
        let line: String = env
            .get_string((&obj).into())
            .map_err(|e| BridgeError::Jni(format!("String conversion failed: {}", e)))?
            .into();
        Ok(Some(line))
    }
}

#[cfg(target_os = "android")]
impl Default for AndroidHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "android")]
impl Host for AndroidHost {
    fn storage_permission_granted(&self) -> bool {
        match self.call_bool("hasStoragePermission") {
            Ok(granted) => granted,
            Err(e) => {
                log::error!("hasStoragePermission failed: {}", e);
                false
            }
        }
    }

    fn should_show_permission_rationale(&self) -> bool {
        match self.call_bool("shouldShowStorageRationale") {
            Ok(show) => show,
            Err(e) => {
                log::error!("shouldShowStorageRationale failed: {}", e);
                false
            }
        }
    }

    fn request_storage_permission(&mut self, request_code: u32) {
        if let Err(e) = self.call_with_int("requestStoragePermission", request_code as i32) {
            log::error!("requestStoragePermission failed: {}", e);
        }
    }

    fn camera_handler_available(&self) -> bool {
        match self.call_bool("hasCameraHandler") {
            Ok(available) => available,
            Err(e) => {
                log::error!("hasCameraHandler failed: {}", e);
                false
            }
        }
    }

    fn dispatch_image_capture(&mut self, output: &Path, request_code: u32) {
        let path = output.to_string_lossy();
        if let Err(e) = self.call_dispatch("launchCamera", &path, request_code) {
            log::error!("launchCamera failed: {}", e);
        }
    }

    fn dispatch_image_pick(&mut self, prompt: &str, request_code: u32) {
        if let Err(e) = self.call_dispatch("launchImagePicker", prompt, request_code) {
            log::error!("launchImagePicker failed: {}", e);
        }
    }

    fn show_notice(&mut self, message: &str) {
        if let Err(e) = self.call_with_string("showNotice", message) {
            log::error!("showNotice failed: {}", e);
        }
    }

    fn scan_media(&mut self, paths: &[&Path], mime_types: &[&str]) {
        for (i, path) in paths.iter().enumerate() {
            let mime = mime_types.get(i).copied().unwrap_or("");
            let path = path.to_string_lossy();
            if let Err(e) = self.scan_media_file(&path, mime) {
                // Fire-and-forget: a failed scan only delays gallery visibility.
                log::warn!("scanMediaFile failed for {}: {}", path, e);
            }
        }
    }

    fn poll_event(&mut self) -> Option<HostEvent> {
        let line = match self.take_event_line() {
            Ok(line) => line?,
            Err(e) => {
                log::error!("polling bridge events failed: {}", e);
                return None;
            }
        };
        match parse_bridge_event(&line) {
            Some(event) => Some(event),
            None => {
                log::warn!("dropping malformed bridge event: {:?}", line);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permission_grant() {
        assert_eq!(
            parse_bridge_event("perm:2:granted"),
            Some(HostEvent::PermissionResult {
                request_code: 2,
                granted: true,
            })
        );
    }

    #[test]
    fn test_parse_permission_denial() {
        assert_eq!(
            parse_bridge_event("perm:2:denied"),
            Some(HostEvent::PermissionResult {
                request_code: 2,
                granted: false,
            })
        );
    }

    #[test]
    fn test_parse_result_with_uri_keeps_colons() {
        let event = parse_bridge_event("result:3:ok:content://media/external/images/123");
        assert_eq!(
            event,
            Some(HostEvent::ActivityResult {
                request_code: 3,
                outcome: ActivityOutcome::Ok,
                uri: Some(ImageUri::new("content://media/external/images/123")),
            })
        );
    }

    #[test]
    fn test_parse_result_without_uri() {
        assert_eq!(
            parse_bridge_event("result:1:ok"),
            Some(HostEvent::ActivityResult {
                request_code: 1,
                outcome: ActivityOutcome::Ok,
                uri: None,
            })
        );
    }

    #[test]
    fn test_parse_result_empty_uri_is_none() {
        assert_eq!(
            parse_bridge_event("result:1:ok:"),
            Some(HostEvent::ActivityResult {
                request_code: 1,
                outcome: ActivityOutcome::Ok,
                uri: None,
            })
        );
    }

    #[test]
    fn test_parse_cancelled_result() {
        assert_eq!(
            parse_bridge_event("result:1:cancelled"),
            Some(HostEvent::ActivityResult {
                request_code: 1,
                outcome: ActivityOutcome::Cancelled,
                uri: None,
            })
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(parse_bridge_event("  perm:2:granted\n").is_some());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_bridge_event(""), None);
        assert_eq!(parse_bridge_event("perm"), None);
        assert_eq!(parse_bridge_event("perm:abc:granted"), None);
        assert_eq!(parse_bridge_event("perm:2:maybe"), None);
        assert_eq!(parse_bridge_event("result:1:exploded"), None);
        assert_eq!(parse_bridge_event("toast:hello"), None);
    }
}
