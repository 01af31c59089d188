fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = prost_build::Config::new();
    config.bytes(&["."]);

    let onnx_dir = "protos/onnx";
    let onnx_files = vec![format!("{}/onnx.proto", onnx_dir)];

    config.compile_protos(&onnx_files, &[onnx_dir])?;

    println!("cargo:rerun-if-changed=protos");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");
    Ok(())
}
