fn main() {
    pdf_organizer_lib::run()
}
