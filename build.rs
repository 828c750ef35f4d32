// Build script for flutter_rust_bridge code generation
//
// flutter_rust_bridge v2 bindings are generated out of band:
//   flutter_rust_bridge_codegen generate
//
// The generated files are:
// - lib/bridge/api.dart (Dart bindings)
// - src/bridge_generated.rs (Rust FFI glue code)

fn main() {
    // Tell cargo to rerun this build script if the FFI surface changes
    println!("cargo:rerun-if-changed=src/api.rs");
}
