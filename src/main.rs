use clap::{Arg, ArgMatches, Command};
use spy_words::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn cli() -> Command<'static> {
    Command::new("spywords")
        .version("0.1.0")
        .about("间谍猜词游戏")
        .subcommand_required(true)
        .subcommand(
            Command::new("new")
                .about("开始新游戏")
                .arg(
                    Arg::new("teams")
                        .long("teams")
                        .help("队伍数量 (2/3)")
                        .takes_value(true)
                        .possible_values(["2", "3"]),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("先手队伍 (blue/red/green)")
                        .takes_value(true),
                )
                .arg(Arg::new("pass").long("pass").help("翻错时换手"))
                .arg(
                    Arg::new("no-pass")
                        .long("no-pass")
                        .help("翻错时不换手")
                        .conflicts_with("pass"),
                ),
        )
        .subcommand(Command::new("status").about("显示当前棋盘"))
        .subcommand(
            Command::new("reveal").about("翻开一张牌").arg(
                Arg::new("index")
                    .help("卡牌序号 (0-24)")
                    .required(true)
                    .index(1),
            ),
        )
        .subcommand(Command::new("pass").about("换手"))
        .subcommand(Command::new("key").about("显示密钥（仅限间谍首领）"))
        .subcommand(Command::new("share").about("生成给间谍首领的分享链接"))
        .subcommand(
            Command::new("leader").about("打开间谍首领视图").arg(
                Arg::new("token")
                    .help("分享链接或令牌")
                    .required(true)
                    .index(1),
            ),
        )
        .subcommand(Command::new("reset").about("放弃当前游戏"))
        .subcommand(Command::new("clear-all").about("清除全部游戏数据"))
}

fn run(matches: &ArgMatches, config: &Config) -> Result<()> {
    let store = FileStore::open(config.data_dir())?;
    let word_bank = WordBank::new(&config.word_bank.file_path);
    let view = ConsoleView::new(std::io::stdout());
    let mut session = Session::new(store, word_bank, view, config.share.base_url.clone());

    match matches.subcommand() {
        Some(("new", args)) => {
            let team_count = match args.value_of("teams") {
                Some(teams) => TeamCount::try_from(teams.parse::<u8>().unwrap_or(0))?,
                None => config.default_team_count()?,
            };
            let starting_team = match args.value_of("start") {
                Some(team) => team.parse()?,
                None => config.default_starting_team()?,
            };
            let turn_pass_on_miss = if args.is_present("pass") {
                true
            } else if args.is_present("no-pass") {
                false
            } else {
                session
                    .turn_pass_preference()
                    .unwrap_or(config.game.turn_pass_on_miss)
            };

            let mut rng = rand::rng();
            session.start_new_game(starting_team, team_count, turn_pass_on_miss, &mut rng)?;
        }
        Some(("status", _)) => {
            if !session.resume() {
                session
                    .view_mut()
                    .show_notice("没有进行中的游戏，使用 new 开始新游戏");
            }
        }
        Some(("reveal", args)) => {
            let index: usize = args
                .value_of("index")
                .unwrap_or_default()
                .parse()
                .map_err(|_| Error::Game("卡牌序号必须是数字".to_string()))?;
            session.resume();
            if session.reveal(index)?.is_none() {
                session.view_mut().show_notice("这张牌已经翻开了");
            }
        }
        Some(("pass", _)) => {
            session.resume();
            session.pass_turn()?;
        }
        Some(("key", _)) => {
            session.resume();
            session.show_key()?;
        }
        Some(("share", _)) => {
            let link = session.share_link()?;
            session
                .view_mut()
                .show_notice(&format!("把这个链接发给间谍首领:\n{}", link));
        }
        Some(("leader", args)) => {
            session.show_leader_view(args.value_of("token").unwrap_or_default())?;
        }
        Some(("reset", _)) => {
            session.reset()?;
            session.view_mut().show_notice("当前游戏已放弃");
        }
        Some(("clear-all", _)) => {
            session.clear_all()?;
            session.view_mut().show_notice("✅ 所有游戏数据已清除");
        }
        _ => unreachable!("clap 要求必须提供子命令"),
    }

    Ok(())
}

fn main() {
    let matches = cli().get_matches();

    // 初始化全局配置
    if let Err(e) = Config::init() {
        eprintln!("配置初始化失败: {}", e);
        std::process::exit(2);
    }
    let config = Config::get();

    // 初始化日志
    tracing_subscriber::registry()
        .with(EnvFilter::new(config.log_filter()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("配置加载成功: {:?}", config);

    if let Err(e) = run(&matches, config) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
