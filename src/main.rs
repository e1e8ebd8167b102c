fn main() {
    suitekit::cli::run();
}
