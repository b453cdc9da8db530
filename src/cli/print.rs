macro_rules! course_command_prefix {
    () => ({
        use std::io::Write;
        print!("Course command> ");
        if let Err(e) = std::io::stdout().flush() {
            tracing::warn!("Output flush failed: {}", e);
        }
    });
}

macro_rules! course_print {
    ($($arg:tt)*) => ({
        println!();
        println!($($arg)*);
    })
}
