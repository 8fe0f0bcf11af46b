use clap::{Arg, ArgAction, Command};

pub fn command() -> Command {
    Command::new("gmb-reviews")
        .version("0.1.0")
        .about("Browse, filter and reply to business location reviews")
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .value_name("URL")
                .help("Base URL of the reviews API")
                .global(true),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("Bearer token for the reviews API")
                .global(true),
        )
        .arg(
            Arg::new("account-id")
                .long("account-id")
                .value_name("ACCOUNT_ID")
                .help("Account whose reviews are listed")
                .global(true),
        )
        .arg(
            Arg::new("per-page")
                .long("per-page")
                .value_name("N")
                .help("Reviews per page")
                .global(true),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .help("Directory for log files")
                .global(true),
        )
        .subcommand(Command::new("browse").about("Interactive review dashboard (default)"))
        .subcommand(
            Command::new("list")
                .about("Fetch one page of reviews and print it")
                .arg(Arg::new("search").long("search").value_name("TEXT"))
                .arg(
                    Arg::new("stars")
                        .long("stars")
                        .value_name("1-5")
                        .value_parser(clap::value_parser!(u8).range(1..=5)),
                )
                .arg(
                    Arg::new("reply-status")
                        .long("reply-status")
                        .value_name("replied|not_replied"),
                )
                .arg(Arg::new("sort").long("sort").value_name("ORDER"))
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_name("N")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                )
                .arg(Arg::new("from").long("from").value_name("YYYY-MM-DD"))
                .arg(Arg::new("to").long("to").value_name("YYYY-MM-DD"))
                .arg(
                    Arg::new("has-comment")
                        .long("has-comment")
                        .action(ArgAction::SetTrue)
                        .help("Only reviews with a written comment"),
                ),
        )
        .subcommand(
            Command::new("reply")
                .about("Reply to a single review")
                .arg(Arg::new("review-id").required(true))
                .arg(Arg::new("text").required(true))
                .arg(
                    Arg::new("private")
                        .long("private")
                        .action(ArgAction::SetTrue)
                        .help("Do not publish the reply"),
                ),
        )
        .subcommand(
            Command::new("reply-batch")
                .about("Post replies from a JSON file of {reviewId, text, isPublic}")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("location")
                .about("Show a location profile")
                .arg(Arg::new("location-id").required(true)),
        )
        .subcommand(
            Command::new("hygiene")
                .about("Show the profile completeness checklist for a location")
                .arg(Arg::new("location-id").required(true)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let matches = command()
            .try_get_matches_from(["gmb-reviews", "list", "--stars", "4", "--token", "t"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("token").map(String::as_str), Some("t"));
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "list");
        assert_eq!(sub.get_one::<u8>("stars"), Some(&4));
    }

    #[test]
    fn star_filter_is_bounded() {
        assert!(command()
            .try_get_matches_from(["gmb-reviews", "list", "--stars", "6"])
            .is_err());
    }
}
