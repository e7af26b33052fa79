//! Domain layer: message, account and phone-number types with validation (no I/O).

mod account;
mod message;
mod options;
mod phone;
mod validation;

pub use account::Account;
pub use message::{
    AliyunBuilder, Category, Cl253Builder, HuaweiBuilder, JuheBuilder, LuosimaoBuilder, Message,
    MessageType, SmsBuilder, SmsbaoBuilder, SubmailBuilder, TencentBuilder, UcpBuilder,
    VolcengineBuilder, YuntongxunBuilder, YunpianBuilder, aliyun, cl253, huawei, juhe, luosimao,
    smsbao, submail, tencent, ucp, volcengine, yuntongxun, yunpian,
};
pub use options::{
    AliyunOptions, Cl253Options, HuaweiOptions, JuheOptions, LuosimaoOptions, ProviderOptions,
    SmsbaoOptions, SubmailOptions, SubmailSignType, TencentOptions, UcpOptions, VendorOptions,
    VolcengineOptions, YuntongxunOptions, YunpianOptions,
};
pub use phone::{CHINA_REGION_CODE, PhoneFormat, PhoneNumber, RegionCode};
pub use validation::ValidationError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_and_account_agree_on_sub_provider() {
        let message = huawei().to("13800000001").template_id("tpl").build();
        let account = Account::new("hw", "huawei", "key", "secret");
        assert_eq!(message.sub_provider(), account.sub_provider);
        assert_eq!(HuaweiOptions::SUB_PROVIDER, "huawei");
    }

    #[test]
    fn mobiles_field_name_is_shared() {
        assert_eq!(Message::MOBILES_FIELD, PhoneNumber::FIELD);
    }
}
