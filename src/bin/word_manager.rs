use clap::{Arg, Command};
use spy_words::history::UsedWordTracker;
use spy_words::storage::FileStore;
use spy_words::word_bank::WordBank;

fn main() {
    let matches = Command::new("词库管理器")
        .version("1.0")
        .about("管理间谍猜词游戏的词库和已用词记录")
        .subcommand(Command::new("list").about("列出所有词语"))
        .subcommand(Command::new("stats").about("显示词库统计信息"))
        .subcommand(Command::new("validate").about("验证词库完整性"))
        .subcommand(
            Command::new("export").about("导出词库到文件").arg(
                Arg::new("file")
                    .help("输出文件路径")
                    .required(true)
                    .index(1),
            ),
        )
        .subcommand(Command::new("history").about("列出已用词记录"))
        .subcommand(Command::new("clear-history").about("清除已用词记录"))
        .get_matches();

    // 初始化配置
    if let Err(e) = spy_words::config::Config::init() {
        eprintln!("配置初始化失败: {}", e);
        return;
    }
    let config = spy_words::config::Config::get();

    let word_bank = WordBank::new(&config.word_bank.file_path);
    let store = match FileStore::open(config.data_dir()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("无法打开数据目录: {}", e);
            return;
        }
    };
    let mut tracker = UsedWordTracker::new(store);

    match matches.subcommand() {
        Some(("list", _)) => {
            println!("词库共 {} 个词:", word_bank.len());
            for entry in word_bank.entries() {
                println!("  {:>4}  {}", entry.id, entry.word);
            }
        }
        Some(("stats", _)) => {
            let stats = word_bank.get_stats(&tracker.load_used_ids());
            println!("词库统计信息:");
            println!("  总词数: {}", stats.total_words);
            println!("  已用: {}", stats.used_words);
            println!("  未用: {}", stats.unused_words);
        }
        Some(("validate", _)) => {
            let errors = word_bank.validate();
            if errors.is_empty() {
                println!("词库验证通过！");
            } else {
                println!("词库验证发现 {} 个问题:", errors.len());
                for error in errors {
                    println!("  - {}", error);
                }
            }
        }
        Some(("export", args)) => {
            let file_path = args.value_of("file").unwrap_or_default();
            if let Err(e) = word_bank.save_to_file(file_path) {
                eprintln!("导出失败: {}", e);
            } else {
                println!("成功导出词库到: {}", file_path);
            }
        }
        Some(("history", _)) => {
            let records = tracker.records();
            println!("已用词记录 {} 条:", records.len());
            for record in records {
                let word = word_bank.get(record.id).unwrap_or("?");
                println!("  {:>4}  {:<12} {}", record.id, word, record.date);
            }
        }
        Some(("clear-history", _)) => {
            if let Err(e) = tracker.clear() {
                eprintln!("清除失败: {}", e);
            } else {
                println!("已清除已用词记录");
            }
        }
        _ => {
            println!("请使用 --help 查看可用命令");
        }
    }
}
