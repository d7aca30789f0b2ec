//! 集成测试公共模块

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// 创建测试用的 binlog 解码文本文件
#[allow(dead_code)]
pub fn create_test_dump(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// 标准测试内容：一个事务内的 INSERT、UPDATE、DELETE
#[allow(dead_code)]
pub const SAMPLE_DUMP: &str = r#"# The proper term is pseudo_replica_mode, but we use this compatibility alias
# to make the statement usable on server versions 8.0.24 and older.
/*!50530 SET @@SESSION.PSEUDO_SLAVE_MODE=1*/;
DELIMITER /*!*/;
# at 4
#241201 10:30:20 server id 1  end_log_pos 126 CRC32 0x6f9a3c21 	Start: binlog v 4, server v 8.0.36 created 241201 10:30:20
# at 157
#241201 10:30:20 server id 1  end_log_pos 236 CRC32 0x1e2d9a4b 	GTID	last_committed=0	sequence_number=1	rbr_only=yes
SET @@SESSION.GTID_NEXT= '3e11fa47-71ca-11e1-9e33-c80aa9429562:23'/*!*/;
# at 236
#241201 10:30:20 server id 1  end_log_pos 311 CRC32 0x8c1f22d0 	Query	thread_id=8	exec_time=0	error_code=0
SET TIMESTAMP=1733049020/*!*/;
BEGIN
/*!*/;
# at 311
#241201 10:30:20 server id 1  end_log_pos 374 CRC32 0x2b0c7e11 	Table_map: `shop`.`orders` mapped to number 90
# at 374
#241201 10:30:20 server id 1  end_log_pos 430 CRC32 0x5d4e1f02 	Write_rows: table id 90 flags: STMT_END_F
### INSERT INTO `shop`.`orders`
### SET
###   @1=1
###   @2='alice'
###   @3=12.50
###   @4=NULL
# at 430
#241201 10:31:05 server id 1  end_log_pos 510 CRC32 0x7a3b9c44 	Update_rows: table id 90 flags: STMT_END_F
### UPDATE `shop`.`orders`
### WHERE
###   @1=1
###   @2='alice'
###   @3=12.50
###   @4=NULL
### SET
###   @1=1
###   @2='alice'
###   @3=15.00
###   @4=NULL
# at 510
#241201 10:32:40 server id 1  end_log_pos 570 CRC32 0x0c9d8e71 	Delete_rows: table id 90 flags: STMT_END_F
### DELETE FROM `shop`.`orders`
### WHERE
###   @1=2
###   @2='bob'
###   @3=3.00
###   @4='vip'
# at 570
#241201 10:32:40 server id 1  end_log_pos 601 CRC32 0x4f55aa90 	Xid = 77
COMMIT/*!*/;
SET @@SESSION.GTID_NEXT= 'AUTOMATIC' /* added by mysqlbinlog */ /*!*/;
DELIMITER ;
# End of log file
"#;

/// 两个事务，第二个事务没有 SET TIMESTAMP，时间来自事件头
#[allow(dead_code)]
pub const MULTI_TRANSACTION_DUMP: &str = r#"BEGIN
#241201 11:00:00 server id 2  end_log_pos 100 CRC32 0x01 	Write_rows: table id 91 flags: STMT_END_F
### INSERT INTO `crm`.`leads`
###   @1=10
###   @2='O\'Brien'
#241201 11:00:00 server id 2  end_log_pos 131 CRC32 0x02 	Xid = 501
COMMIT/*!*/;
BEGIN
#241201 12:15:30 server id 2  end_log_pos 200 CRC32 0x03 	Update_rows: table id 91 flags: STMT_END_F
### UPDATE `crm`.`leads`
### WHERE
###   @1=10
###   @2='O\'Brien'
### SET
###   @1=10
###   @2='O\'Neil'
### UPDATE `crm`.`leads`
### WHERE
###   @1=11
###   @2='x'
### SET
###   @1=12
###   @2='x'
COMMIT/*!*/;
"#;

/// 含格式异常值的内容
#[allow(dead_code)]
pub const MALFORMED_DUMP: &str = "### INSERT INTO `d`.`t`\n###   @1=NULL54\n###   @2='truncated\n###   @3=garbage\u{7}text\n### DELETE FROM `d`.`t`\n### INSERT INTO `d`.`t`\n###   @1=-1 (4294967295)\nCOMMIT\n";

/// 生成指定数量 INSERT 的内容
#[allow(dead_code)]
pub fn generate_inserts(table: &str, rows: usize) -> String {
    let mut content = String::from("BEGIN\n");
    for i in 0..rows {
        content.push_str(&format!(
            "#241201 10:30:20 server id 1  end_log_pos {} CRC32 0x00 \tWrite_rows: table id 90 flags: STMT_END_F\n### INSERT INTO `bench`.`{table}`\n###   @1={i}\n###   @2='row_{i}'\n###   @3={i}.5\n",
            100 + i * 60
        ));
    }
    content.push_str("COMMIT/*!*/;\n");
    content
}

/// 创建多个测试文件
#[allow(dead_code)]
pub fn create_multiple_test_files(dir: &TempDir, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| create_test_dump(dir, &format!("binlog_{:03}.txt", i + 1), &generate_inserts(&format!("t{i}"), i + 1)))
        .collect()
}
