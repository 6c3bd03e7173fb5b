use std::path::PathBuf;

#[cfg(target_os = "android")]
fn android_files_dir() -> Option<PathBuf> {
    use jni::{
        objects::{JObject, JString},
        JavaVM,
    };
    unsafe {
        let ctx = ndk_context::android_context();
        let vm = JavaVM::from_raw(ctx.vm().cast()).ok()?;
        let mut env = vm.attach_current_thread().ok()?; // mutable for JNI calls
        let activity = JObject::from_raw(ctx.context().cast());
        let files_dir = env
            .call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_obj = env
            .call_method(files_dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_jstring: JString = JString::from(abs_path_obj);
        let abs_path: String = env.get_string(&abs_path_jstring).ok()?.into();
        Some(PathBuf::from(abs_path))
    }
}

#[cfg(target_os = "android")]
fn android_pictures_dir() -> Option<PathBuf> {
    use jni::{
        objects::{JString, JValue},
        JavaVM,
    };
    unsafe {
        let ctx = ndk_context::android_context();
        let vm = JavaVM::from_raw(ctx.vm().cast()).ok()?;
        let mut env = vm.attach_current_thread().ok()?;
        let env_cls = env.find_class("android/os/Environment").ok()?;
        let pictures_name = env
            .get_static_field(&env_cls, "DIRECTORY_PICTURES", "Ljava/lang/String;")
            .ok()?
            .l()
            .ok()?;
        let dir = env
            .call_static_method(
                &env_cls,
                "getExternalStoragePublicDirectory",
                "(Ljava/lang/String;)Ljava/io/File;",
                &[JValue::Object(&pictures_name)],
            )
            .ok()?
            .l()
            .ok()?;
        let abs_path_obj = env
            .call_method(dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
            .ok()?
            .l()
            .ok()?;
        let abs_path_jstring: JString = JString::from(abs_path_obj);
        let abs_path: String = env.get_string(&abs_path_jstring).ok()?.into();
        Some(PathBuf::from(abs_path))
    }
}

/// Get the app data directory for the current platform
pub fn get_app_data_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        if let Some(dir) = android_files_dir() {
            return dir;
        }
        // Fallbacks
        for d in [
            "/data/user/0/com.pixie.pixie/files",
            "/data/data/com.pixie.pixie/files",
        ] {
            let p = PathBuf::from(d);
            if p.exists() {
                return p;
            }
        }
        PathBuf::from("./data")
    }

    #[cfg(not(target_os = "android"))]
    {
        // On desktop, use ./data directory
        PathBuf::from("./data")
    }
}

/// Get the shared pictures directory photos are saved under
pub fn get_pictures_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        if let Some(dir) = android_pictures_dir() {
            return dir;
        }
        // Fallbacks
        for d in ["/storage/emulated/0/Pictures", "/sdcard/Pictures"] {
            let p = PathBuf::from(d);
            if p.exists() {
                return p;
            }
        }
        PathBuf::from("/storage/emulated/0/Pictures")
    }

    #[cfg(not(target_os = "android"))]
    {
        dirs::picture_dir().unwrap_or_else(|| PathBuf::from("./Pictures"))
    }
}
