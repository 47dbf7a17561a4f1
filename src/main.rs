fn main() -> Result<(), Box<dyn std::error::Error>> {
    matrix_chat::cli::main()
}
