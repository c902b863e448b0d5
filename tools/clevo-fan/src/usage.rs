use std::io::{self, Write};

pub fn main_usage(out: &mut impl Write, prog: &str) -> io::Result<()> {
    write!(
        out,
        "\n\
         Usage:\n  \
           {prog} <command> [options]\n\
         \n\
         Commands:\n  \
           get                 Get fan info\n  \
           set                 Set fan info\n  \
           help                Show this message\n  \
           version             Show version information\n\
         \n"
    )
}

pub fn get_usage(out: &mut impl Write, prog: &str) -> io::Result<()> {
    write!(
        out,
        "\n\
         Usage:\n  \
           {prog} get [options]\n\
         \n\
         Options:\n  \
           -h, --help          Show this message\n  \
           -v, --version       Show version information\n  \
           -b, --bare          Bare output\n  \
           -c, --cpu-temp      Only print CPU temperature\n  \
           -g, --gpu-temp      Only print GPU temperature\n  \
           -d, --fan-duty      Only print FAN duty\n  \
           -r, --fan-rpms      Only print FAN speed\n\
         \n"
    )
}

pub fn set_usage(out: &mut impl Write, prog: &str) -> io::Result<()> {
    write!(
        out,
        "\n\
         Usage:\n  \
           {prog} set [options]\n\
         \n\
         Options:\n  \
           -h, --help          Show this message\n  \
           -v, --version       Show version information\n  \
           -d, --fan-duty=N    Set FAN duty (0-100)\n\
         \n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl Fn(&mut Vec<u8>, &str) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf, "clevo-fan").expect("write to vec");
        String::from_utf8(buf).expect("utf-8")
    }

    #[test]
    fn usage_names_the_program() {
        let text = render(|out, prog| main_usage(out, prog));
        assert!(text.starts_with("\nUsage:\n  clevo-fan <command> [options]\n"));
        assert!(text.contains("\n  version             Show version information\n"));
    }

    #[test]
    fn get_usage_lists_every_selector() {
        let text = render(|out, prog| get_usage(out, prog));
        for long in ["--bare", "--cpu-temp", "--gpu-temp", "--fan-duty", "--fan-rpms"] {
            assert!(text.contains(long), "{long} missing");
        }
    }

    #[test]
    fn set_usage_documents_the_range() {
        let text = render(|out, prog| set_usage(out, prog));
        assert!(text.contains("  -d, --fan-duty=N    Set FAN duty (0-100)\n"));
    }
}
