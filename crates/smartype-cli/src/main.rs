fn main() {
    smartype_cli::run_main();
}
