use indicatif::ProgressStyle;

pub fn encode_bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:<8} {bar:40.cyan/blue} {percent:>3}% {pos}/{len} frames [{elapsed_precise}<{eta_precise}] rects {msg}",
    )
    .expect("invalid encode bar template")
}

pub fn encode_spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:<8} {spinner:.cyan.bold} [{elapsed_precise}] frames {pos} • rects {msg}",
    )
    .expect("invalid encode spinner template")
    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}
