use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata consumed by --version and pkg_version()
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
