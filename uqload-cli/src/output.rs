use colored::*;
use uqload_dl::VideoMetadata;

const RULE_WIDTH: usize = 60;

pub fn format_video_info(metadata: &VideoMetadata, colored: bool) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut output = String::new();

    output.push_str(&rule);
    output.push('\n');
    let heading = "\t\tvideo info";
    if colored {
        output.push_str(&heading.green().bold().to_string());
    } else {
        output.push_str(heading);
    }
    output.push('\n');
    output.push_str(&rule);
    output.push('\n');

    for (key, value) in metadata.rows() {
        let value = if key == "size" {
            format!("{value} bytes")
        } else {
            value
        };
        if colored {
            output.push_str(&format!("{} : {}\n", key.yellow(), value.cyan()));
        } else {
            output.push_str(&format!("{key} : {value}\n"));
        }
    }

    output.push_str(&rule);
    output.push('\n');
    output
}
